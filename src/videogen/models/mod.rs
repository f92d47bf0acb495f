pub mod seedance;

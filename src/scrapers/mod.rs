pub mod fplform;

pub mod var;

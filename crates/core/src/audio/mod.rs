pub mod io;
pub mod prepare;

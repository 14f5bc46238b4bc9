mod check;

pub use check::*;

mod settle;

pub use settle::*;

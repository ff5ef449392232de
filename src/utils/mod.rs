// src/utils/mod.rs
mod numeric;

pub(crate) use numeric::*;

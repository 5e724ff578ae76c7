use ndarray::{CowArray, Ix3};

pub type CowArray3<'a, T> = CowArray<'a, T, Ix3>;

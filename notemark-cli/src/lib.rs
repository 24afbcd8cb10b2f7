//! Library side of the `notemark` binary: the inspect transforms, kept here so they can be
//! unit tested apart from argument parsing.

pub mod transforms;

//! Aggregation and faceted convergence plots for SLOPE solver benchmarks.

#![forbid(missing_docs)]
#![allow(non_upper_case_globals)]

extern crate chrono;
#[macro_use]
extern crate clap_lib;
extern crate ansi_term as ansi;
extern crate atty;
extern crate csv;
extern crate glob;
extern crate parquet;
extern crate regex;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate lazy_static;
extern crate rayon;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate toml;

#[cfg(test)]
extern crate tempfile;

pub mod consts;
pub mod errors;
#[macro_use]
pub mod common;
pub mod clap;
pub mod extract;
pub mod load;
pub mod plot;

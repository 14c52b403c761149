pub mod run;
pub mod search;
pub mod serve;
pub mod stats;

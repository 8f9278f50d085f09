pub mod aggregator;
pub mod classifier;
pub mod m3u_parser;
pub mod merger;
pub mod tokenizer;

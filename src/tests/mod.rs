use super::*;

mod dom_tree_and_parser;
mod page_runtime;
mod selector_engine;

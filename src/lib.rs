pub mod fixer_core;

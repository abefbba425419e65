//! different utility modules used throughout the project
/// terminal and file logging on top of simplelog
pub mod logger;
/// parse document with structure like " title1 key1: value1, value2 key2: value2 title2 key3:value3, value4" into HashMap,
/// binding strings like "x=pi;y=2" and variable lists like "x;y"
pub mod task_parser;

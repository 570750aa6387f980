mod tests_errors;
mod tests_lexer;
mod tests_parse;
mod tests_recovery;

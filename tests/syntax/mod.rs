mod tests_incremental;
mod tests_properties;
mod tests_tree;

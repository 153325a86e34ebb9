pub mod deletable_row;

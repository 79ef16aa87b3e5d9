pub mod cat_file;
pub mod hash_object;
pub mod ls_files;
pub mod rev_parse;
pub mod write_tree;

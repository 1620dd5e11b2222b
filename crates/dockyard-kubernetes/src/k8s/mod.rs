pub mod cluster;
pub mod delete_ext;
pub mod meta_ext;

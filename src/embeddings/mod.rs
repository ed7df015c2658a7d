pub mod vector_loader;
pub mod vector_writer;

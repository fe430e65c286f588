pub mod table_writer;

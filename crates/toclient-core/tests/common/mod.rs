pub mod to_server;

mod transport;

pub use transport::JsonLinesTransport;

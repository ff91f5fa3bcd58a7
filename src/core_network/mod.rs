pub mod data;
pub mod pasv;
pub mod stream;

pub use stream::FtpStream;

//! Client Module
//!
//! Blocking TCP client for the record protocol, plus the input parsing and
//! reply rendering used by the interactive CLI.

mod shell;

pub use shell::{parse_input, render_reply, split_args, ShellAction, HELP_TEXT};

use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::net::{Shutdown, TcpStream};

use crate::error::{PatientDbError, Result};
use crate::protocol::{decode_reply, Reply};

/// A connection to a patientdb server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    server: String,
}

impl Client {
    /// Connect to `addr` (host:port)
    pub fn connect(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
            server: addr.to_string(),
        })
    }

    /// Send one wire line and wait for its reply
    pub fn request(&mut self, line: &str) -> Result<Reply> {
        self.write_line(line)?;

        let mut reply = String::new();
        if self.reader.read_line(&mut reply)? == 0 {
            return Err(PatientDbError::Io(std::io::Error::new(
                ErrorKind::UnexpectedEof,
                "Connection lost",
            )));
        }
        decode_reply(&reply)
    }

    /// Send `EXIT` and close the stream
    pub fn close(mut self) -> Result<()> {
        self.write_line("EXIT")?;
        self.writer.get_ref().shutdown(Shutdown::Both)?;
        Ok(())
    }

    /// Address this client connected to
    pub fn server(&self) -> &str {
        &self.server
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

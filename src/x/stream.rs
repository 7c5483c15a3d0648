//! The control socket: one command per connection, an optional one line
//! reply, then the connection is closed

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::Sender;
use std::{
    fs,
    io::{BufRead, BufReader, Read, Write},
    net::Shutdown,
    os::unix::net::{UnixListener, UnixStream},
    path::{Path, PathBuf},
    thread::{self, JoinHandle},
    time::Duration,
};

/// How long a client may take to send its command
const READ_TIMEOUT: Duration = Duration::from_secs(5);

// ============================= Request ============================== [[[

/// A command read from a control client, along with the connection the
/// reply is written to
#[derive(Debug)]
pub(crate) struct Request {
    /// Whitespace separated words of the command. Never empty
    pub(crate) tokens: Vec<String>,
    /// Connection to the client
    stream:            UnixStream,
}

impl Request {
    /// Answer the client and close the connection
    pub(crate) fn reply(mut self, reply: Option<&str>) -> Result<()> {
        if let Some(reply) = reply {
            writeln!(self.stream, "{}", reply).context("failed to write reply")?;
        }
        self.stream
            .shutdown(Shutdown::Both)
            .context("failed to shutdown stream")
    }

    /// Read one line from the client. `None` if it sent nothing
    fn read(stream: UnixStream) -> Result<Option<Self>> {
        stream
            .set_read_timeout(Some(READ_TIMEOUT))
            .context("failed to set read timeout")?;

        let mut line = String::new();
        BufReader::new(&stream)
            .read_line(&mut line)
            .context("failed to read command")?;

        let tokens = line
            .split_whitespace()
            .map(ToOwned::to_owned)
            .collect::<Vec<_>>();

        Ok((!tokens.is_empty()).then(|| Self { tokens, stream }))
    }
} // ]]] === Request ===

// ============================== Server ============================== [[[

/// The listening end of the control socket. The socket file is removed when
/// this is dropped
#[derive(Debug)]
pub(crate) struct Server {
    /// Path of the socket file
    path:     PathBuf,
    /// Socket listener
    listener: UnixListener,
}

impl Server {
    /// Bind the socket, replacing a stale socket file
    pub(crate) fn bind<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        drop(fs::remove_file(&path));

        let listener = UnixListener::bind(&path)
            .context(format!("failed to bind socket listener: {}", path.display()))?;
        log::debug!("listening on {}", path.display());

        Ok(Self { path, listener })
    }

    /// Accept connections on a new thread, sending every command on
    /// `requests`. Each connection is read on its own thread so a slow client
    /// can't hold up the others. Failures go to `errors`
    pub(crate) fn spawn(
        &self,
        requests: Sender<Request>,
        errors: Sender<anyhow::Error>,
    ) -> Result<JoinHandle<()>> {
        let listener = self
            .listener
            .try_clone()
            .context("failed to clone socket listener")?;

        thread::Builder::new()
            .name(String::from("ltwm-socket"))
            .spawn(move || {
                for stream in listener.incoming() {
                    let stream = match stream {
                        Ok(stream) => stream,
                        Err(e) => {
                            drop(errors.send(anyhow!(e).context("failed to accept connection")));
                            continue;
                        },
                    };

                    let requests = requests.clone();
                    let errors = errors.clone();
                    thread::spawn(move || match Request::read(stream) {
                        Ok(Some(request)) =>
                            if requests.send(request).is_err() {
                                log::debug!("dispatcher is gone, dropping request");
                            },
                        Ok(None) => {},
                        Err(e) => drop(errors.send(e)),
                    });
                }
            })
            .context("failed to spawn socket thread")
    }
} // ]]] === Server ===

impl Drop for Server {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            log::warn!("failed to remove socket {}: {}", self.path.display(), e);
        }
    }
}

/// Send a command to a running window manager, returning its reply
pub(crate) fn send_message<P: AsRef<Path>>(path: P, args: &[String]) -> Result<Option<String>> {
    let path = path.as_ref();
    let mut stream = UnixStream::connect(path)
        .context(format!("failed to connect to {}", path.display()))?;

    writeln!(stream, "{}", args.join(" ")).context("failed to send message")?;
    stream
        .shutdown(Shutdown::Write)
        .context("failed to shutdown stream")?;

    let mut reply = String::new();
    stream
        .read_to_string(&mut reply)
        .context("failed to read reply")?;

    let reply = reply.trim_end();
    Ok((!reply.is_empty()).then(|| reply.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::{send_message, Server};
    use std::{thread, time::Duration};

    #[test]
    fn one_command_per_connection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ltwm.sock");

        let server = Server::bind(&path).unwrap();
        let (tx, rx) = crossbeam_channel::unbounded();
        let (err_tx, err_rx) = crossbeam_channel::unbounded();
        server.spawn(tx, err_tx).unwrap();

        let client_path = path.clone();
        let client = thread::spawn(move || {
            send_message(&client_path, &["ratio".to_owned(), "+0.05".to_owned()]).unwrap()
        });

        let request = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(request.tokens, vec!["ratio", "+0.05"]);
        request.reply(Some("0.7")).unwrap();
        assert_eq!(client.join().unwrap(), Some(String::from("0.7")));

        // No reply is a valid answer
        let client_path = path.clone();
        let client = thread::spawn(move || {
            send_message(&client_path, &["reset-layout".to_owned()]).unwrap()
        });
        rx.recv_timeout(Duration::from_secs(5))
            .unwrap()
            .reply(None)
            .unwrap();
        assert_eq!(client.join().unwrap(), None);
        assert!(err_rx.try_recv().is_err());

        drop(server);
        assert!(!path.exists());
    }
}

// vim: ft=rust:et:sw=4:ts=2:sts=4:tw=99:fdm=marker:fmr=[[[,]]]:

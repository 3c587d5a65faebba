//! Framed request / response channels over TCP.
//!
//! Each frame is length-delimited and carries one bincode-encoded message. A channel is typed on
//! both ends: `Channel<I, O>` sends `I` and receives `O`, so the server side of an exchange is a
//! `Channel<Response, Request>` and the client side a `Channel<Request, Response>`.
use futures::prelude::*;
use serde::{Deserialize, Serialize};
use std::io;
use std::net::SocketAddr;
use tokio::net::tcp::{ReadHalf, WriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio_serde::formats::*;
use tokio_serde::Framed;
use tokio_util::codec::{FramedRead, FramedWrite, LengthDelimitedCodec};

/// Largest frame accepted on a channel. A transfer response carries a whole weights file.
pub const MAX_FRAME_LENGTH: usize = 1 << 30;

pub type Reader<'a, I, O> =
    Framed<FramedRead<ReadHalf<'a>, LengthDelimitedCodec>, O, I, Bincode<O, I>>;

pub type Writer<'a, I, O> =
    Framed<FramedWrite<WriteHalf<'a>, LengthDelimitedCodec>, O, I, Bincode<O, I>>;

pub struct Receiver<'a, I, O> {
    reader: Reader<'a, I, O>,
}

impl<'a, I, O> Receiver<'a, I, O>
where
    I: for<'de> Deserialize<'de> + Serialize,
    O: for<'de> Deserialize<'de> + Serialize,
    Reader<'a, I, O>: TryStream<Ok = O, Error = io::Error> + Unpin,
{
    /// Waits for the next message. `None` means the remote closed the connection.
    pub async fn recv(&mut self) -> io::Result<Option<O>> {
        self.reader.try_next().await
    }
}

pub struct Sender<'a, I, O> {
    writer: Writer<'a, I, O>,
}

impl<'a, I, O> Sender<'a, I, O>
where
    I: for<'de> Deserialize<'de> + Serialize,
    O: for<'de> Deserialize<'de> + Serialize,
    Writer<'a, I, O>: Sink<I, Error = io::Error> + Unpin,
{
    pub async fn send(&mut self, item: I) -> io::Result<()> {
        self.writer.send(item).await
    }
}

pub struct Channel<I, O> {
    socket: TcpStream,
    ghost: std::marker::PhantomData<(I, O)>,
}

impl<I, O> Channel<I, O>
where
    I: for<'de> Deserialize<'de> + Serialize,
    O: for<'de> Deserialize<'de> + Serialize,
{
    pub async fn connect(address: &SocketAddr) -> io::Result<Channel<I, O>> {
        let socket = TcpStream::connect(address).await?;
        Ok(Channel { socket, ghost: Default::default() })
    }

    /// Accepts the next inbound connection, returning the channel and the remote address.
    pub async fn accept(listener: &TcpListener) -> io::Result<(Channel<I, O>, SocketAddr)> {
        let (socket, remote) = listener.accept().await?;
        Ok((Channel { socket, ghost: Default::default() }, remote))
    }

    pub fn split(&mut self) -> (Sender<'_, I, O>, Receiver<'_, I, O>) {
        let (reader, writer) = self.socket.split();

        let reader = FramedRead::new(reader, codec());
        let reader = Framed::new(reader, Bincode::default());

        let writer = FramedWrite::new(writer, codec());
        let writer = Framed::new(writer, Bincode::default());

        (Sender { writer }, Receiver { reader })
    }
}

fn codec() -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder().max_frame_length(MAX_FRAME_LENGTH).new_codec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Deserialize, Serialize)]
    pub struct Ask(Vec<u8>);
    #[derive(Debug, PartialEq, Deserialize, Serialize)]
    pub struct Answer(Vec<u8>);

    #[actix_rt::test]
    async fn test_binary_frames_cross_unmodified() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        // every byte value, twice, including zeroes and 0xff runs
        let blob: Vec<u8> = (0..=255u8).chain(0..=255u8).collect();
        let expected = blob.clone();

        let server = tokio::spawn(async move {
            let (mut channel, _remote): (Channel<Answer, Ask>, _) =
                Channel::accept(&listener).await.unwrap();
            let (mut sender, mut receiver) = channel.split();
            let Ask(bytes) = receiver.recv().await.unwrap().unwrap();
            let mut reversed = bytes.clone();
            reversed.reverse();
            sender.send(Answer(reversed)).await.unwrap();
        });

        let mut channel: Channel<Ask, Answer> = Channel::connect(&address).await.unwrap();
        let (mut sender, mut receiver) = channel.split();
        sender.send(Ask(blob)).await.unwrap();
        let answer = receiver.recv().await.unwrap();
        let mut reversed = expected;
        reversed.reverse();
        assert_eq!(answer, Some(Answer(reversed)));

        server.await.unwrap();
    }

    #[actix_rt::test]
    async fn test_recv_none_on_close() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            // accept and drop immediately
            let _ = Channel::<Answer, Ask>::accept(&listener).await.unwrap();
        });

        let mut channel: Channel<Ask, Answer> = Channel::connect(&address).await.unwrap();
        server.await.unwrap();
        let (_sender, mut receiver) = channel.split();
        assert_eq!(receiver.recv().await.unwrap(), None);
    }
}

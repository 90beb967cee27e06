//! Wire codecs: request head decoding and response fragment encoding.
//!
//! Both sides ride on `tokio_util`'s codec machinery: the connection wraps
//! its read half in a `FramedRead<_, RequestDecoder>` and its write half in
//! a `FramedWrite<_, FragmentEncoder>`. The decoder leaves over-read body
//! bytes in the framed read buffer; the encoder writes fragments exactly as
//! the session feeds them.

mod fragment_encoder;
mod request_decoder;

pub use fragment_encoder::FragmentEncoder;
pub use request_decoder::RequestDecoder;

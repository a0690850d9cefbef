use super::*;
use crate::protocol::{Request, Response};

#[tokio::test]
async fn write_then_read_message_roundtrips() {
    let mut buf: Vec<u8> = Vec::new();
    write_message(&mut buf, b"hello").await.unwrap();

    let mut cursor = std::io::Cursor::new(buf);
    let got = read_message(&mut cursor).await.unwrap();
    assert_eq!(got, b"hello");
}

#[tokio::test]
async fn read_message_on_empty_stream_is_connection_closed() {
    let mut cursor = std::io::Cursor::new(Vec::<u8>::new());
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed));
}

#[tokio::test]
async fn oversized_length_prefix_is_rejected_before_reading_payload() {
    let mut buf = Vec::new();
    let huge_len = (MAX_MESSAGE_SIZE as u32) + 1;
    buf.extend_from_slice(&huge_len.to_be_bytes());

    let mut cursor = std::io::Cursor::new(buf);
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::MessageTooLarge { .. }));
}

#[tokio::test]
async fn request_and_response_roundtrip_through_the_wire() {
    let mut buf: Vec<u8> = Vec::new();
    let req = Request::Ping;
    let encoded = encode(&req).unwrap();
    write_message(&mut buf, &encoded).await.unwrap();

    let mut cursor = std::io::Cursor::new(buf);
    let decoded: Request = read_request(&mut cursor, DEFAULT_TIMEOUT).await.unwrap();
    assert_eq!(decoded, req);

    let mut resp_buf: Vec<u8> = Vec::new();
    write_response(&mut resp_buf, &Response::Pong, DEFAULT_TIMEOUT).await.unwrap();
    let mut resp_cursor = std::io::Cursor::new(resp_buf);
    let resp_bytes = read_message(&mut resp_cursor).await.unwrap();
    let resp: Response = decode(&resp_bytes).unwrap();
    assert_eq!(resp, Response::Pong);
}

#[tokio::test]
async fn length_prefix_is_big_endian_four_bytes() {
    let mut buf: Vec<u8> = Vec::new();
    write_message(&mut buf, b"abcd").await.unwrap();
    assert_eq!(&buf[0..4], &[0, 0, 0, 4]);
}

// Unit tests for the worker pipe framing

use crate::transport::frame::{MAX_FRAME_LEN, read_frame, write_frame};
use crate::wire::WireSessionMessage;

use models::{ArgumentKey, BROADCAST_SOURCE, Command, SessionMessage};

use prost::Message as ProstMessage;

use tokio::io::{AsyncWriteExt, duplex};

#[tokio::test]
async fn given_two_frames_when_read_back_then_order_and_content_preserved() {
    // GIVEN: Two frames written to an in-memory pipe
    let (mut writer, mut reader) = duplex(4096);
    let start = SessionMessage::new(BROADCAST_SOURCE.uid(), Command::StartSource)
        .with_argument(ArgumentKey::SourceToken, "c291cmNl");
    let stop = SessionMessage::new(BROADCAST_SOURCE.uid(), Command::StopSource);

    write_frame(&mut writer, &WireSessionMessage::from(&start)).await.unwrap();
    write_frame(&mut writer, &WireSessionMessage::from(&stop)).await.unwrap();
    drop(writer);

    // WHEN: Reading until end of stream
    let first = read_frame(&mut reader).await.unwrap().unwrap();
    let second = read_frame(&mut reader).await.unwrap().unwrap();
    let end = read_frame(&mut reader).await.unwrap();

    // THEN: Both frames arrive in order, then a clean end
    let first = WireSessionMessage::decode(&first[..]).unwrap();
    let second = WireSessionMessage::decode(&second[..]).unwrap();
    assert_eq!(SessionMessage::try_from(first).unwrap(), start);
    assert_eq!(SessionMessage::try_from(second).unwrap(), stop);
    assert!(end.is_none());
}

/// **VALUE**: Verifies that an oversized length prefix is rejected before allocating.
///
/// **BUG THIS CATCHES**: A corrupted or hostile prefix would otherwise make the worker
/// allocate up to 4 GiB.
#[tokio::test]
async fn given_oversized_length_prefix_when_reading_then_returns_frame_error() {
    let (mut writer, mut reader) = duplex(64);
    writer.write_u32((MAX_FRAME_LEN + 1) as u32).await.unwrap();

    let result = read_frame(&mut reader).await;

    let err = result.expect_err("oversized frame must fail");
    assert!(err.to_string().contains("Frame Error"));
}

#[tokio::test]
async fn given_truncated_payload_when_reading_then_returns_error() {
    let (mut writer, mut reader) = duplex(64);
    writer.write_u32(10).await.unwrap();
    writer.write_all(&[1, 2, 3]).await.unwrap();
    drop(writer);

    assert!(read_frame(&mut reader).await.is_err());
}

/// **VALUE**: Verifies that an intact frame with an undecodable payload is handed back
/// as bytes and leaves the stream positioned at the next frame.
///
/// **BUG THIS CATCHES**: Folding the decode into the read turns one bad payload into a
/// stream failure, which tears down every live session in the worker.
#[tokio::test]
async fn given_undecodable_payload_when_read_then_bytes_returned_and_stream_continues() {
    // GIVEN: A garbage frame followed by a valid one
    let (mut writer, mut reader) = duplex(4096);
    let stop = SessionMessage::new(BROADCAST_SOURCE.uid(), Command::StopSource);
    writer.write_u32(3).await.unwrap();
    writer.write_all(&[0xff, 0xff, 0xff]).await.unwrap();
    write_frame(&mut writer, &WireSessionMessage::from(&stop)).await.unwrap();
    drop(writer);

    // WHEN: Reading payloads
    let garbage = read_frame(&mut reader).await.unwrap().unwrap();
    let next = read_frame(&mut reader).await.unwrap().unwrap();

    // THEN: The garbage comes back raw and the following frame still decodes
    assert_eq!(garbage, vec![0xff, 0xff, 0xff]);
    let next = WireSessionMessage::decode(&next[..]).unwrap();
    assert_eq!(SessionMessage::try_from(next).unwrap(), stop);
}

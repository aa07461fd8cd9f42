//! Line streaming over child output handles.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Read lines from a child output handle as an async stream.
///
/// Line terminators are stripped; the stream ends at end-of-file.
pub fn read_lines<R>(reader: R) -> impl futures_core::Stream<Item = std::io::Result<String>>
where
    R: AsyncRead + Unpin,
{
    let lines = BufReader::new(reader).lines();
    futures_util::stream::unfold(lines, |mut lines| async {
        match lines.next_line().await {
            Ok(Some(line)) => Some((Ok(line), lines)),
            Ok(None) => None,
            Err(e) => Some((Err(e), lines)),
        }
    })
}

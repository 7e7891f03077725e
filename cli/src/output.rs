//! CSV rendering of discovered peers.

use cometbft_peers_crawler::DiscoveredPeer;
use std::fs::File;
use std::io;
use std::path::Path;

/// Header row of the output file.
pub const HEADER: [&str; 3] = ["ip", "moniker", "version"];

/// Write `peers` as CSV, one row per peer in the given order.
pub fn write_peers<W: io::Write>(writer: W, peers: &[DiscoveredPeer]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;
    for peer in peers {
        wtr.write_record([&peer.ip, &peer.moniker, &peer.version])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Create (or truncate) the file at `path` and write `peers` into it.
///
/// A failure halfway leaves the partially written file behind.
pub fn write_peers_to_path(path: &Path, peers: &[DiscoveredPeer]) -> Result<(), csv::Error> {
    let file = File::create(path)?;
    write_peers(file, peers)
}

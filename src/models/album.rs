use std::collections::HashMap;

use super::MediaRecord;

const UNKNOWN_ALBUM: &str = "Unknown";

#[derive(Debug, Clone, PartialEq)]
pub struct Album {
    pub album_id: i64,
    pub name: String,
    /// Location handle of the first (newest) record.
    pub cover: String,
    pub count: usize,
}

/// Groups records by album id, largest album first.
pub fn group_by_album(records: &[MediaRecord]) -> Vec<Album> {
    let mut albums: Vec<Album> = Vec::new();
    let mut by_id: HashMap<i64, usize> = HashMap::new();

    for record in records {
        match by_id.get(&record.album_id) {
            Some(&idx) => albums[idx].count += 1,
            None => {
                by_id.insert(record.album_id, albums.len());
                let name = if record.album_name.is_empty() {
                    UNKNOWN_ALBUM.to_string()
                } else {
                    record.album_name.clone()
                };
                albums.push(Album {
                    album_id: record.album_id,
                    name,
                    cover: record.location.clone(),
                    count: 1,
                });
            }
        }
    }

    // Stable sort keeps first-occurrence order among equal counts.
    albums.sort_by(|a, b| b.count.cmp(&a.count));
    albums
}

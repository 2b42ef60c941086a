//! Adapter layer: Convert Fanart.tv DTOs to domain records.
//!
//! Fanart only supplies imagery; every record it contributes is sparse on
//! purpose and fills the picture/banner/logo/fanart slots.

use super::dto;
use crate::model::{AlbumRecord, ArtistRecord, Provenance, ProviderId};

pub fn to_artist(root: dto::ArtistImagesRoot) -> ArtistRecord {
    let mut backgrounds = root.artistbackground;
    backgrounds.sort_by(|a, b| b.likes().cmp(&a.likes()));
    let mut fanarts = backgrounds.into_iter().map(|i| i.url);

    ArtistRecord {
        name: root.name.unwrap_or_default(),
        picture_url: best_image(root.artistthumb),
        banner_url: best_image(root.musicbanner),
        logo_url: best_image(root.musiclogo),
        fanart_url: fanarts.next(),
        fanart2_url: fanarts.next(),
        fanart3_url: fanarts.next(),
        fanart4_url: fanarts.next(),
        fanart5_url: fanarts.next(),
        provenance: Provenance::Provider(ProviderId::Fanart),
        ..Default::default()
    }
}

pub fn to_album(root: dto::AlbumImagesRoot) -> Option<AlbumRecord> {
    // The response nests covers under the queried release-group id; we
    // asked for exactly one group, so take whichever entry came back.
    let covers = root.albums.into_values().next()?.albumcover;
    let picture_url = best_image(covers)?;

    Some(AlbumRecord {
        picture_url: Some(picture_url),
        provenance: Provenance::Provider(ProviderId::Fanart),
        ..Default::default()
    })
}

/// Highest-voted image, if any.
fn best_image(images: Vec<dto::FanartImage>) -> Option<String> {
    images
        .into_iter()
        .max_by_key(|i| i.likes())
        .map(|i| i.url)
        .filter(|url| !url.is_empty())
}

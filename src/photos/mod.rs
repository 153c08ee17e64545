mod client;
mod google;
mod types;

pub use client::{ClientConnector, LibraryClient};
pub use google::GooglePhotosConnector;
pub use types::MediaItem;

#[cfg(test)]
pub use client::ByteStream;
#[cfg(test)]
pub use types::{MediaItemsPage, MediaMetadata};

//! In-memory catalog backend

use super::{CatalogStorage, Item, StorageResult};
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Catalog held in a map keyed by item id
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    items: BTreeMap<u32, Item>,
}

impl InMemoryCatalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog pre-populated with the storefront products
    pub fn seeded() -> Self {
        Self::from_items(seed_items())
    }

    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Self {
        Self {
            items: items.into_iter().map(|item| (item.id, item)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl CatalogStorage for InMemoryCatalog {
    async fn list_items(&self) -> StorageResult<Vec<Item>> {
        Ok(self.items.values().cloned().collect())
    }

    async fn get_item(&self, id: u32) -> StorageResult<Option<Item>> {
        Ok(self.items.get(&id).cloned())
    }
}

fn seed_items() -> Vec<Item> {
    const ELECTRONICS: &str = "Electronics";
    const ACCESSORIES: &str = "Accessories";

    vec![
        Item::new(
            1,
            "Premium Wireless Headphones",
            "High-quality wireless headphones with active noise cancellation, 30-hour battery life, and premium sound quality.",
            299.99,
            ELECTRONICS,
            "/static/images/headphones.jpg",
        ),
        Item::new(
            2,
            "Smart Fitness Watch",
            "Advanced smartwatch with heart rate monitoring, GPS tracking, and waterproof design for active lifestyles.",
            399.99,
            ELECTRONICS,
            "/static/images/smartwatch.jpg",
        ),
        Item::new(
            3,
            "Ergonomic Laptop Stand",
            "Adjustable aluminum laptop stand designed to improve posture and reduce neck strain during long work sessions.",
            79.99,
            ACCESSORIES,
            "/static/images/laptop-stand.jpg",
        ),
        Item::new(
            4,
            "Wireless Gaming Mouse",
            "High-precision wireless gaming mouse with customizable RGB lighting and programmable buttons.",
            89.99,
            ACCESSORIES,
            "/static/images/gaming-mouse.jpg",
        ),
        Item::new(
            5,
            "Portable Bluetooth Speaker",
            "Compact portable speaker with 360-degree sound, waterproof design, and 12-hour battery life.",
            129.99,
            ELECTRONICS,
            "/static/images/speaker.jpg",
        ),
        Item::new(
            6,
            "USB-C Multi-Port Hub",
            "Versatile USB-C hub with HDMI, USB 3.0 ports, SD card reader, and power delivery support.",
            89.99,
            ACCESSORIES,
            "/static/images/usb-hub.jpg",
        ),
        Item::new(
            7,
            "Mechanical Keyboard",
            "Premium mechanical keyboard with tactile switches, customizable backlighting, and durable construction.",
            159.99,
            ACCESSORIES,
            "/static/images/keyboard.jpg",
        ),
        Item::new(
            8,
            "Wireless Charging Pad",
            "Fast wireless charging pad compatible with all Qi-enabled devices, with LED indicator and non-slip surface.",
            39.99,
            ELECTRONICS,
            "/static/images/wireless-charger.jpg",
        ),
        Item::new(
            9,
            "HD Webcam",
            "1080p HD webcam with auto-focus, built-in microphone, and privacy shutter for video calls and streaming.",
            69.99,
            ELECTRONICS,
            "/static/images/webcam.jpg",
        ),
        Item::new(
            10,
            "Phone Stand",
            "Adjustable phone stand made from premium materials, perfect for video calls, watching videos, and charging.",
            24.99,
            ACCESSORIES,
            "/static/images/phone-stand.jpg",
        ),
        Item::new(
            11,
            "Tablet Case",
            "Protective tablet case with keyboard attachment, multiple viewing angles, and premium leather finish.",
            59.99,
            ACCESSORIES,
            "/static/images/tablet-case.jpg",
        ),
        Item::new(
            12,
            "Smart Home Hub",
            "Central smart home hub that connects and controls all your smart devices with voice commands and app control.",
            199.99,
            ELECTRONICS,
            "/static/images/smart-hub.jpg",
        ),
    ]
}

//! Static sura table: names and place of revelation

use crate::records::MAX_SURA;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevelationPlace {
    Meccan,
    Medinan,
}

/// Suras conventionally classified as revealed in Medina.
const MEDINAN_SURAS: [u16; 28] = [
    2, 3, 4, 5, 8, 9, 13, 22, 24, 33, 47, 48, 49, 55, 57, 58, 59, 60, 61, 62, 63, 64, 65, 66, 76,
    98, 99, 110,
];

const SURA_NAMES: [&str; MAX_SURA as usize] = [
    "Fatiha", "Bakara", "Al-i İmran", "Nisa", "Maide", "En'am", "A'raf", "Enfal", "Tevbe",
    "Yunus", "Hud", "Yusuf", "Ra'd", "İbrahim", "Hicr", "Nahl", "İsrâ", "Kehf", "Meryem",
    "Taha", "Enbiya", "Hac", "Mü'minun", "Nur", "Furkan", "Şuara", "Neml", "Kasas",
    "Ankebut", "Rum", "Lokman", "Secde", "Ahzab", "Sebe", "Fatır", "Yasin", "Saffat",
    "Sad", "Zümer", "Mü'min", "Fussilet", "Şura", "Zuhruf", "Duhân", "Casiye", "Ahkaf",
    "Muhammed", "Fetih", "Hucurat", "Kaf", "Zariyat", "Tur", "Necm", "Kamer", "Rahman",
    "Vakia", "Hadid", "Mücadele", "Haşr", "Mümtehine", "Saff", "Cuma", "Münafikun",
    "Tegabun", "Talak", "Tahrim", "Mülk", "Kalem", "Hakka", "Me'aric", "Nuh", "Cin",
    "Müzzemmil", "Müddessir", "Kıyame", "İnsan", "Mürselat", "Nebe", "Naziat", "Abese",
    "Tekvir", "İnfitar", "Mutaffifin", "İnşikak", "Buruc", "Tarık", "A'lâ", "Gaşiye",
    "Fecr", "Beled", "Şems", "Leyl", "Duhâ", "İnşirah", "Tin", "Alak", "Kadir", "Beyyine",
    "Zilzal", "Adiyat", "Karia", "Tekasur", "Asr", "Humeze", "Fil", "Kureyş", "Ma'un",
    "Kevser", "Kafirun", "Nasr", "Tebbet", "İhlas", "Felak", "Nas",
];

pub fn is_valid_sura(sura: u16) -> bool {
    (1..=MAX_SURA).contains(&sura)
}

/// `None` for numbers outside 1..=114.
pub fn revelation_place(sura: u16) -> Option<RevelationPlace> {
    if !is_valid_sura(sura) {
        return None;
    }
    if MEDINAN_SURAS.contains(&sura) {
        Some(RevelationPlace::Medinan)
    } else {
        Some(RevelationPlace::Meccan)
    }
}

pub fn sura_name(sura: u16) -> String {
    if is_valid_sura(sura) {
        SURA_NAMES[(sura - 1) as usize].to_string()
    } else {
        format!("Sûre {}", sura)
    }
}

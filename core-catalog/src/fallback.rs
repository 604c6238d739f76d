//! Demo content served when the catalogue is empty or unreachable and
//! placeholder content is enabled.

use crate::models::{Category, RadioStream, SermonDetail, SermonSummary};

const COVER_LOVE: &str =
    "https://images.pexels.com/photos/2774556/pexels-photo-2774556.jpeg?auto=compress&cs=tinysrgb&dpr=1&w=500";
const COVER_PRAYER: &str =
    "https://images.pexels.com/photos/2559749/pexels-photo-2559749.jpeg?auto=compress&cs=tinysrgb&dpr=1&w=500";
const COVER_MARRIAGE: &str =
    "https://images.pexels.com/photos/1486064/pexels-photo-1486064.jpeg?auto=compress&cs=tinysrgb&dpr=1&w=500";
const COVER_NEIGHBOUR: &str =
    "https://images.pexels.com/photos/1727484/pexels-photo-1727484.jpeg?auto=compress&cs=tinysrgb&dpr=1&w=500";
const COVER_RADIO: &str =
    "https://images.pexels.com/photos/3783471/pexels-photo-3783471.jpeg?auto=compress&cs=tinysrgb&dpr=1&w=500";

fn sermon(id: &str, title: &str, preacher: &str, audio: u8, cover: &str) -> SermonSummary {
    SermonSummary {
        id: id.to_string(),
        title: title.to_string(),
        preacher: preacher.to_string(),
        audio_url: format!("https://example.com/sermon{}.mp3", audio),
        image_url: Some(cover.to_string()),
        created_at: None,
    }
}

pub fn categories() -> Vec<Category> {
    [
        ("1", "Amour"),
        ("2", "Sainteté"),
        ("3", "Puissance"),
        ("4", "Équilibre"),
        ("5", "Développement"),
        ("6", "Changement"),
    ]
    .into_iter()
    .map(|(id, name)| Category {
        id: id.to_string(),
        name: name.to_string(),
        created_at: None,
    })
    .collect()
}

/// Home screen carousel and recent list.
pub fn home_sermons() -> Vec<SermonSummary> {
    let base = [
        ("Le pouvoir de l'amour dans la vie chrétienne", "Pasteur Emmanuel", 1, COVER_LOVE),
        ("Comment développer une foi authentique", "Pasteur Marie", 2, COVER_LOVE),
        ("La puissance de la prière et l'exaucement", "Évangéliste Jean", 3, COVER_PRAYER),
    ];
    base.iter()
        .chain(base.iter())
        .enumerate()
        .map(|(i, (title, preacher, audio, cover))| {
            sermon(&(i + 1).to_string(), title, preacher, *audio, cover)
        })
        .collect()
}

pub fn category_sermons() -> Vec<SermonSummary> {
    vec![
        sermon("1", "Le pouvoir de l'amour dans le mariage", "Pasteur Emmanuel", 1, COVER_MARRIAGE),
        sermon("2", "Aimer son prochain comme soi-même", "Pasteur Marie", 2, COVER_NEIGHBOUR),
        sermon("3", "L'amour qui pardonne", "Évangéliste Jean", 3, COVER_LOVE),
    ]
}

pub fn sermon_detail() -> SermonDetail {
    SermonDetail {
        id: "1".to_string(),
        title: "Le pouvoir transformant de l'amour divin".to_string(),
        preacher: "Pasteur Emmanuel".to_string(),
        description: Some(
            "Dans ce message puissant, nous explorons comment l'amour de Dieu peut transformer \
             nos vies, nos relations et notre impact dans le monde. Découvrez les principes \
             bibliques pour manifester cet amour divin dans votre quotidien."
                .to_string(),
        ),
        audio_url: "https://example.com/sermon1.mp3".to_string(),
        image_url: Some(COVER_LOVE.to_string()),
        duration: Some(1845),
        category_id: None,
    }
}

pub fn radio_streams() -> Vec<RadioStream> {
    vec![RadioStream {
        id: "1".to_string(),
        title: "Compa Radio En Direct".to_string(),
        description: Some(
            "Écoutez notre radio en direct 24/7 avec des prédications inspirantes, de la \
             musique chrétienne et des enseignements bibliques."
                .to_string(),
        ),
        stream_url: "https://example.com/radio-stream".to_string(),
        image_url: Some(COVER_RADIO.to_string()),
        is_active: true,
    }]
}

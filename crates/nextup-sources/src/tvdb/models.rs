use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct TvdbEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginData {
    pub token: String,
}

/// TVDB mixes string and numeric ids depending on the endpoint.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// One hit from `/search`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TvdbSearchResult {
    #[serde(default, deserialize_with = "string_or_number")]
    pub tvdb_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub year: Option<String>,
    pub status: Option<String>,
    pub image_url: Option<String>,
    #[serde(rename = "type")]
    pub result_type: Option<String>,
    pub overview: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TvdbStatus {
    pub id: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TvdbSeries {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub status: Option<TvdbStatus>,
    pub image: Option<String>,
    pub first_aired: Option<String>,
    pub last_aired: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub year: Option<String>,
}

impl TvdbSeries {
    pub fn status_name(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.name.as_deref())
    }

    pub fn is_ended(&self) -> bool {
        self.status_name()
            .map(|s| s.eq_ignore_ascii_case("ended"))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TvdbSeasonType {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TvdbSeason {
    pub id: i64,
    pub number: Option<i64>,
    #[serde(rename = "type")]
    pub season_type: Option<TvdbSeasonType>,
    pub image: Option<String>,
}

impl TvdbSeason {
    /// Aired order seasons; DVD and absolute orderings are skipped.
    pub fn is_official(&self) -> bool {
        self.season_type
            .as_ref()
            .and_then(|t| t.kind.as_deref())
            .map(|k| k == "official" || k == "default")
            .unwrap_or(true)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TvdbEpisode {
    pub id: i64,
    pub name: Option<String>,
    pub season_number: Option<i64>,
    pub number: Option<i64>,
    pub image: Option<String>,
    pub aired: Option<String>,
    pub overview: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TvdbArtwork {
    pub image: Option<String>,
    #[serde(rename = "type")]
    pub artwork_type: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TvdbSeasonExtended {
    pub id: i64,
    pub number: Option<i64>,
    pub image: Option<String>,
    #[serde(default)]
    pub episodes: Vec<TvdbEpisode>,
    #[serde(default)]
    pub artwork: Vec<TvdbArtwork>,
}

impl TvdbSeasonExtended {
    /// Season poster: the season's own image, else the first artwork entry.
    pub fn poster(&self) -> Option<&str> {
        self.image
            .as_deref()
            .filter(|i| !i.is_empty())
            .or_else(|| self.artwork.iter().find_map(|a| a.image.as_deref()))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SeriesSeasons {
    #[serde(default)]
    pub seasons: Vec<TvdbSeason>,
}

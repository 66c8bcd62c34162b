//! Addon path routing
//!
//! Stremio resource paths carry the id and a `.json` suffix in the same
//! segment (`/stream/series/pp_onepace:1:1.json`), so they are parsed by
//! hand instead of through router path templates.

/// Logical endpoint addressed by a request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Manifest,
    Catalog { id: String },
    Meta { id: String },
    Stream { id: String },
    Health,
    NotFound,
}

impl Endpoint {
    pub fn parse(path: &str) -> Self {
        let path = path.trim_start_matches('/');

        match path {
            "" | "manifest.json" => return Endpoint::Manifest,
            "health" => return Endpoint::Health,
            _ => {}
        }

        let segments: Vec<&str> = path.split('/').collect();
        let [resource, "series", file] = segments.as_slice() else {
            return Endpoint::NotFound;
        };

        let Some(id) = file
            .strip_suffix(".json")
            .and_then(|raw| urlencoding::decode(raw).ok())
            .map(|id| id.into_owned())
            .filter(|id| !id.is_empty())
        else {
            return Endpoint::NotFound;
        };

        match *resource {
            "catalog" => Endpoint::Catalog { id },
            "meta" => Endpoint::Meta { id },
            "stream" => Endpoint::Stream { id },
            _ => Endpoint::NotFound,
        }
    }
}

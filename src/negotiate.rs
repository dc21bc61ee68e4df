//! `Accept` header negotiation.

#[derive(Debug, Clone, PartialEq)]
struct MediaRange {
    main: String,
    sub: String,
    quality: f32,
}

impl MediaRange {
    fn parse(clause: &str) -> Option<Self> {
        let mut parts = clause.split(';');
        let media = parts.next()?.trim().to_ascii_lowercase();
        let (main, sub) = media.split_once('/')?;
        let (main, sub) = (main.trim(), sub.trim());
        if main.is_empty() || sub.is_empty() || (main == "*" && sub != "*") {
            return None;
        }

        let mut quality = 1.0;
        for param in parts {
            let Some((key, value)) = param.split_once('=') else {
                continue;
            };
            if key.trim().eq_ignore_ascii_case("q") {
                quality = value.trim().parse::<f32>().unwrap_or(0.0).clamp(0.0, 1.0);
            }
        }

        Some(Self {
            main: main.to_string(),
            sub: sub.to_string(),
            quality,
        })
    }

    /// How specifically this range names `main/sub`, or `None` when it does
    /// not cover it at all.
    fn specificity(&self, main: &str, sub: &str) -> Option<u8> {
        match (self.main.as_str(), self.sub.as_str()) {
            ("*", "*") => Some(0),
            (m, "*") if m == main => Some(1),
            (m, s) if m == main && s == sub => Some(2),
            _ => None,
        }
    }
}

fn parse_accept(header: &str) -> Vec<MediaRange> {
    header.split(',').filter_map(MediaRange::parse).collect()
}

/// The quality the client assigns to `candidate`, taken from the most
/// specific range that covers it.
fn quality_of(ranges: &[MediaRange], candidate: &str) -> f32 {
    let candidate = candidate.to_ascii_lowercase();
    let Some((main, sub)) = candidate.split_once('/') else {
        return 0.0;
    };

    ranges
        .iter()
        .filter_map(|range| range.specificity(main, sub).map(|s| (s, range.quality)))
        .fold(None, |best: Option<(u8, f32)>, (s, q)| match best {
            Some((bs, bq)) if bs > s || (bs == s && bq >= q) => Some((bs, bq)),
            _ => Some((s, q)),
        })
        .map_or(0.0, |(_, q)| q)
}

/// Picks the candidate the client prefers. Candidates earlier in the list win
/// ties. A blank header accepts anything.
pub fn negotiate<'a>(accept: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let accept = if accept.trim().is_empty() { "*/*" } else { accept };
    let ranges = parse_accept(accept);

    let mut best: Option<(&'a str, f32)> = None;
    for &candidate in candidates {
        let q = quality_of(&ranges, candidate);
        if q > 0.0 && best.map_or(true, |(_, bq)| q > bq) {
            best = Some((candidate, q));
        }
    }
    best.map(|(candidate, _)| candidate)
}

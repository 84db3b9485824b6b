/// Guesses from a foreground window title whether a movie is playing.
#[derive(Clone, Debug)]
pub struct MovieClassifier {
    markers: Vec<String>,
}

impl MovieClassifier {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(|m| m.as_ref().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    /// Case-insensitive substring match against any marker.
    pub fn is_movie(&self, title: &str) -> bool {
        let title = title.to_lowercase();
        self.markers.iter().any(|m| title.contains(m.as_str()))
    }

    pub fn is_playing(&self, title: Option<&str>) -> bool {
        title.is_some_and(|t| self.is_movie(t))
    }
}

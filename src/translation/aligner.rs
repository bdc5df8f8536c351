/*!
 * Replacement of caption text by its translation, keeping timing intact.
 *
 * Text is taken from and put back into the track through the structural
 * parser, never by line position in the serialized file, so multi-line
 * captions stay attached to their own index and span.
 */

use log::{debug, error, info};

use crate::errors::AlignmentError;
use crate::providers::BatchTranslator;
use crate::subtitle_processor::CaptionTrack;

/// Translates whole caption tracks through an index-preserving batch translator
#[derive(Debug, Clone, Copy)]
pub struct TranslationAligner<'a> {
    translator: &'a dyn BatchTranslator,
}

impl<'a> TranslationAligner<'a> {
    pub fn new(translator: &'a dyn BatchTranslator) -> Self {
        TranslationAligner { translator }
    }

    /// Parse `serialized` as a track in `source_language` and translate it.
    pub async fn align_serialized(
        &self,
        serialized: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<CaptionTrack, AlignmentError> {
        let track = CaptionTrack::parse(serialized, source_language)?;
        self.align(&track, target_language).await
    }

    /// Return a new track in `target_language` with the same indices and spans
    /// as `track` and translated text.
    ///
    /// The whole track goes out as one batch in entry order and comes back
    /// zipped by that order. A batch of the wrong length is an error; `track`
    /// itself is never modified. Collaborator failures are surfaced after a
    /// single attempt.
    pub async fn align(&self, track: &CaptionTrack, target_language: &str) -> Result<CaptionTrack, AlignmentError> {
        if track.is_empty() {
            debug!("Nothing to translate, track is empty");
            return track.with_texts(target_language, Vec::new());
        }

        let texts = track.texts();
        info!(
            "Translating {} caption(s) {} -> {}",
            texts.len(),
            track.language(),
            target_language
        );

        let translated = self
            .translator
            .translate_batch(track.language(), target_language, &texts)
            .await?;

        if translated.len() != texts.len() {
            error!(
                "Translation returned {} text(s) for {} caption(s); refusing to realign",
                translated.len(),
                texts.len()
            );
            return Err(AlignmentError::LengthMismatch {
                submitted: texts.len(),
                returned: translated.len(),
            });
        }

        track.with_texts(target_language, translated)
    }
}

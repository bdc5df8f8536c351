/*!
 * Caption translation.
 *
 * - `aligner`: swaps every caption's text for its translation while keeping
 *   indices and spans, with strict batch length checking
 */

pub use self::aligner::TranslationAligner;

pub mod aligner;

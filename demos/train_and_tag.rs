use postag::{TaggedSentence, Tagger, TreebankTokenizer};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Part-of-Speech Training and Tagging Example");
    println!("===========================================\n");

    // Create training data
    let sentences = vec![
        TaggedSentence::new(&["They", "walk", "the", "dog", "."], &["PRP", "VBP", "DT", "NN", "."])?,
        TaggedSentence::new(&["We", "shop", "daily", "."], &["PRP", "VBP", "RB", "."])?,
        TaggedSentence::new(
            &["They", "clean", "the", "house", "."],
            &["PRP", "VBP", "DT", "NN", "."],
        )?,
        TaggedSentence::new(
            &["We", "'ll", "shop", "later", "."],
            &["PRP", "MD", "VB", "RB", "."],
        )?,
    ];

    println!("Training data:");
    println!("  Sentences: {}", sentences.len());
    for sentence in &sentences {
        println!("  {:?}", sentence.iter().collect::<Vec<_>>());
    }

    // Create and configure tagger
    let mut tagger = Tagger::new(TreebankTokenizer::default());
    tagger.params_mut().set_shuffle_seed(Some(2024));
    println!("\nTraining model...");
    let mut reported = 0;
    tagger.train_with_progress(&sentences, 10, |done, total| {
        let percent = done * 100 / total;
        if percent >= reported + 25 {
            reported = percent;
            println!("  {:>3}%", percent);
        }
    })?;

    // Save and reload
    let model_path = std::env::temp_dir().join("example_model.postag");
    println!("\nSaving model to {}...", model_path.display());
    tagger.save(&model_path)?;
    let tagger = Tagger::load(TreebankTokenizer::default(), &model_path)?;

    println!("\nTagging:");
    let text = "They'll walk the house daily.";
    println!("  Input: {}", text);
    for token in tagger.tag(text)? {
        println!("  {}", token);
    }
    println!(
        "\nAccuracy on training data: {:.3}",
        tagger.evaluate(&sentences)?
    );

    Ok(())
}

use postag::{Model, TaggedSentence, Trainer};

fn corpus() -> Vec<TaggedSentence> {
    let mut sentences = Vec::new();
    for _ in 0..25 {
        sentences.push(TaggedSentence::from_pairs(vec![
            ("the", "DT"),
            ("dog", "NN"),
            ("barks", "VBZ"),
        ]));
    }
    sentences.push(TaggedSentence::from_pairs(vec![
        ("a", "DT"),
        ("cat", "NN"),
        ("sleeps", "VBZ"),
    ]));
    sentences.push(TaggedSentence::from_pairs(vec![
        ("dogs", "NNS"),
        ("bark", "VBP"),
    ]));
    sentences
}

fn train(seed: u64) -> Model {
    let mut trainer = Trainer::new().with_epochs(4).unwrap().with_shuffle_seed(seed);
    for sentence in corpus() {
        trainer.append_sentence(sentence);
    }
    trainer.train().unwrap()
}

#[test]
fn test_training_is_reproducible() {
    let first = train(1234);
    let second = train(1234);
    assert_eq!(first, second);
    assert_eq!(first.to_bytes().unwrap(), second.to_bytes().unwrap());
}

#[test]
fn test_tag_dictionary_thresholds() {
    let model = train(1);
    // seen 25 times with a single tag
    assert_eq!(model.lookup("the"), Some("DT"));
    assert_eq!(model.lookup("dog"), Some("NN"));
    assert_eq!(model.lookup("barks"), Some("VBZ"));
    // below the frequency threshold
    assert_eq!(model.lookup("cat"), None);
    assert_eq!(model.lookup("dogs"), None);
    assert_eq!(model.tag_dictionary().len(), 3);

    let classes: Vec<_> = model.classes().iter().map(String::as_str).collect();
    assert_eq!(classes, ["DT", "NN", "NNS", "VBP", "VBZ"]);
}

#[test]
fn test_averaged_weights_are_rounded() {
    let model = train(99);
    for (_, _, weight) in model.weights().iter() {
        assert_ne!(weight, 0.0);
        let scaled = weight * 1000.0;
        assert!((scaled - scaled.round()).abs() < 1e-6, "{}", weight);
    }
}

#[test]
fn test_progress_reports_every_sentence() {
    let mut trainer = Trainer::new().with_epochs(2).unwrap().with_shuffle_seed(5);
    for sentence in corpus() {
        trainer.append_sentence(sentence);
    }
    let total = corpus().len() * 2;
    let mut last = 0;
    let model = trainer
        .train_with_progress(|done, all| {
            assert_eq!(all, total);
            assert!(done > last);
            last = done;
        })
        .unwrap();
    assert_eq!(last, total);
    assert!(!model.classes().is_empty());
}

#[test]
fn test_retraining_starts_fresh() {
    let mut trainer = Trainer::new().with_shuffle_seed(3);
    trainer
        .append(&["Colorless", "ideas"], &["JJ", "NNS"])
        .unwrap();
    let first = trainer.train().unwrap();
    trainer.clear();
    trainer.append(&["ideas", "sleep"], &["NNS", "VBP"]).unwrap();
    let second = trainer.train().unwrap();

    let classes: Vec<_> = second.classes().iter().map(String::as_str).collect();
    assert_eq!(classes, ["NNS", "VBP"]);
    assert!(first.classes().contains("JJ"));
}

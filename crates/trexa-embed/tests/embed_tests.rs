use trexa_core::config::EmbeddingSettings;
use trexa_core::traits::Embedder;
use trexa_embed::{get_default_embedder, EmbeddingAdapter, FakeEmbedder, E5_SMALL_DIM};

fn fake_adapter(batch_size: usize) -> EmbeddingAdapter {
    EmbeddingAdapter::new(Box::new(FakeEmbedder::new(E5_SMALL_DIM)), batch_size)
}

fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn words(n: usize) -> String {
    (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
}

#[test]
fn fake_embedder_is_selected_from_settings() {
    let settings = EmbeddingSettings { use_fake: true, ..EmbeddingSettings::default() };
    let embedder = get_default_embedder(&settings).expect("embedder");
    assert_eq!(embedder.dim(), E5_SMALL_DIM);

    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    assert!((norm(&embs[0]) - 1.0).abs() <= 1e-3, "vector is L2-normalized");
    for (a, b) in embs[0].iter().zip(&embs[1]) {
        assert!((a - b).abs() <= 1e-6);
    }
}

#[test]
fn query_and_passage_roles_differ_but_stay_normalized() {
    let adapter = fake_adapter(8);
    let text = "solar panels on the barn roof";
    let q = adapter.embed_query(text).unwrap();
    let p = adapter.embed_passage_chunks(text, 256).unwrap();
    assert_eq!(p.len(), 1);
    assert_ne!(q, p[0]);
    assert!((norm(&q) - 1.0).abs() < 1e-3);
    assert!((norm(&p[0]) - 1.0).abs() < 1e-3);
}

#[test]
fn six_hundred_words_yield_three_passage_vectors() {
    let adapter = fake_adapter(2);
    let vectors = adapter.embed_passage_chunks(&words(600), 256).unwrap();
    assert_eq!(vectors.len(), 3);
    assert!(vectors.iter().all(|v| v.len() == E5_SMALL_DIM));
}

#[test]
fn blank_text_yields_no_vectors() {
    let adapter = fake_adapter(4);
    assert!(adapter.embed_passage_chunks("", 256).unwrap().is_empty());
    assert!(adapter.embed_passage_chunks(" \n\t ", 256).unwrap().is_empty());
}

#[test]
fn batching_preserves_chunk_order() {
    let text = words(10);
    let batched = fake_adapter(3).embed_passage_chunks(&text, 2).unwrap();
    let single = fake_adapter(100).embed_passage_chunks(&text, 2).unwrap();
    assert_eq!(batched.len(), 5);
    assert_eq!(batched, single);
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Pooling and normalization helpers shared by the embedding backends

use ndarray::ArrayView2;

/// Attention-masked mean pooling over token embeddings.
///
/// `token_embeddings` is `[seq_len, hidden_dim]`; `attention_mask` has one
/// entry per token (1 for real tokens, 0 for padding).
pub fn mean_pool(token_embeddings: ArrayView2<f32>, attention_mask: &[i64]) -> Vec<f32> {
    let (seq_len, hidden_dim) = token_embeddings.dim();

    let mut pooled = vec![0.0f32; hidden_dim];
    let mut sum_mask = 0.0f32;

    for (i, &mask) in attention_mask.iter().take(seq_len).enumerate() {
        let mask_value = mask as f32;
        if mask_value == 0.0 {
            continue;
        }
        sum_mask += mask_value;
        for (j, value) in pooled.iter_mut().enumerate() {
            *value += token_embeddings[[i, j]] * mask_value;
        }
    }

    for value in &mut pooled {
        *value /= sum_mask.max(1e-9);
    }

    pooled
}

/// Euclidean length of `vector`
pub fn l2_norm(vector: &[f64]) -> f64 {
    vector.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Scales `vector` to unit length in place and returns its original norm.
///
/// A zero vector is left untouched.
pub fn l2_normalize(vector: &mut [f64]) -> f64 {
    let norm = l2_norm(vector);
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
    norm
}

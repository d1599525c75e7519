use candle::{DType, Device, Result, Tensor};
use candle_core as candle;
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use std::path::Path;

/// BERT-family encoder followed by attention-masked mean pooling.
pub(crate) struct MeanPooledBert {
    bert: BertModel,
    hidden_size: usize,
}

impl MeanPooledBert {
    /// Loads `config.json` + `model.safetensors` from `model_dir`.
    ///
    /// Accepts bare sentence-transformer checkpoints as well as ones nested under a `bert.` or
    /// `roberta.` prefix.
    pub(crate) fn load<P: AsRef<Path>>(model_dir: P, device: &Device, dtype: DType) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let config_path = model_dir.join("config.json");
        let weights_path = model_dir.join("model.safetensors");

        let config_content = std::fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)
            .map_err(|e| candle::Error::Msg(format!("Failed to parse config: {}", e)))?;

        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], dtype, device)? };

        let bert = if vb.contains_tensor("bert.embeddings.word_embeddings.weight") {
            BertModel::load(vb.pp("bert"), &config)?
        } else if vb.contains_tensor("roberta.embeddings.word_embeddings.weight") {
            BertModel::load(vb.pp("roberta"), &config)?
        } else {
            BertModel::load(vb, &config)?
        };

        Ok(Self {
            bert,
            hidden_size: config.hidden_size,
        })
    }

    pub(crate) fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Returns `[batch, hidden]` mean-pooled F32 sentence vectors (not yet normalized).
    pub(crate) fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor> {
        let hidden = self
            .bert
            .forward(input_ids, token_type_ids, Some(attention_mask))?
            .to_dtype(DType::F32)?;

        // [batch, seq] -> [batch, seq, 1] so padding positions contribute nothing.
        let mask = attention_mask.to_dtype(DType::F32)?.unsqueeze(2)?;
        let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
        let counts = mask.sum(1)?.maximum(1e-9f64)?;

        summed.broadcast_div(&counts)
    }
}

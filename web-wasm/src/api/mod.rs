//! ブラウザ組み込みの言語モデルAPI連携

pub mod device_model;

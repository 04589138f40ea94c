//! gRPC method paths

/// `CryptoService.cryptoTransfer`
pub const CRYPTO_TRANSFER: &str = "/proto.CryptoService/cryptoTransfer";

/// `CryptoService.createAccount`
pub const CRYPTO_CREATE_ACCOUNT: &str = "/proto.CryptoService/createAccount";

/// `CryptoService.getTransactionReceipts`
pub const CRYPTO_GET_RECEIPT: &str = "/proto.CryptoService/getTransactionReceipts";

/// `CryptoService.cryptoGetBalance`
pub const CRYPTO_GET_BALANCE: &str = "/proto.CryptoService/cryptoGetBalance";

/// `ConsensusService.createTopic`
pub const CONSENSUS_CREATE_TOPIC: &str = "/proto.ConsensusService/createTopic";

/// `ConsensusService.submitMessage`
pub const CONSENSUS_SUBMIT_MESSAGE: &str = "/proto.ConsensusService/submitMessage";

/// `FileService.appendContent`
pub const FILE_APPEND: &str = "/proto.FileService/appendContent";

/// Mirror node `ConsensusService.subscribeTopic`
pub const MIRROR_SUBSCRIBE_TOPIC: &str =
    "/com.hedera.mirror.api.proto.ConsensusService/subscribeTopic";

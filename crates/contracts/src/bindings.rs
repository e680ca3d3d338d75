//! ABI bindings for the four deployed contracts. Only the methods the bot calls are
//! declared.

use alloy::sol;

sol! {
    #[sol(rpc)]
    interface IHedgyToken {
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
        function approve(address spender, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
        function decimals() external view returns (uint8);
        function symbol() external view returns (string memory);
        function name() external view returns (string memory);
    }

    #[sol(rpc)]
    interface IHedgyFaucet {
        function requestTokens() external;
        function canRequestTokens(address account) external view returns (bool);
        function timeUntilNextDrip(address account) external view returns (uint256);
        function dripAmount() external view returns (uint256);
        function cooldownTime() external view returns (uint256);
        function getFaucetBalance() external view returns (uint256);
    }

    #[sol(rpc)]
    interface IHedgyBuy {
        function buyTokens() external payable;
        function calculateTokenAmount(uint256 hbarAmount) external view returns (uint256);
        function calculateHBARCost(uint256 tokenAmount) external view returns (uint256);
        function tokenPrice() external view returns (uint256);
        function minPurchase() external view returns (uint256);
        function maxPurchase() external view returns (uint256);
        function getTokenBalance() external view returns (uint256);
    }

    #[sol(rpc)]
    interface IHedgySell {
        function sellTokens(uint256 amount) external;
        function calculateHBARAmount(uint256 tokenAmount) external view returns (uint256);
        function calculateTokenAmount(uint256 hbarAmount) external view returns (uint256);
        function tokenPrice() external view returns (uint256);
        function minSell() external view returns (uint256);
        function maxSell() external view returns (uint256);
        function getHBARBalance() external view returns (uint256);
    }
}
